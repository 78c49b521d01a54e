mod time;

pub use time::LocalTimer;
