//! Infrastructure layer - storage, price sources, and notification transport

pub mod sources;
pub mod storage;
pub mod notify;
