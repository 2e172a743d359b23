mod serial;

pub use serial::{open_serial, PendingBytes, SerialLink};
