pub mod defaults;
pub mod entities;
pub mod ownership;
pub mod ports;
pub mod schedule;
pub mod services;
pub mod synthesis;

#[cfg(test)]
pub mod test_helpers;
