pub mod sample_queue;
