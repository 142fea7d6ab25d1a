pub mod profile;
pub mod record;
pub mod roster;
pub mod signals;
pub mod stats;
