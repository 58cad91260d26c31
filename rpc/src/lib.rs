// Copyright 2018 Kodebox, Inc.
// This file is part of InkChain.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

extern crate inkchain_core as icore;
extern crate inkchain_key as ikey;
#[macro_use]
extern crate inkchain_logger as ilogger;
extern crate inkchain_types as itypes;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod gateway;
mod message;
mod session;

pub use crate::gateway::Gateway;
pub use crate::message::{Request, Response};
pub use crate::session::{SessionManager, SessionStatus};
