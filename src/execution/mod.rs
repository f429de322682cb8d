pub mod dispatcher;

pub use dispatcher::ExecutionDispatcher;
