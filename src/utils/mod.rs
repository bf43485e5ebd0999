pub mod similarity;
pub mod worker_pool;
