pub mod local;
pub mod watch;

pub use local::LocalDb;
pub use watch::TaskListWatcher;
