pub mod cfg;
pub mod cmd;
pub mod dispatcher;
pub mod engine;
pub mod logging;
pub mod observation;
pub mod pool;
pub mod sink;
pub mod target;
