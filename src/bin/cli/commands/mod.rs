pub mod cards;
pub mod cert;
pub mod export;
pub mod journal;
pub mod log;
pub mod review;
pub mod stats;
