//! Per-message handlers, one file each, all implemented on
//! [`crate::Synchronizer`].

mod blocks_request;
mod blocks_response;
mod hello;
mod proposal;
