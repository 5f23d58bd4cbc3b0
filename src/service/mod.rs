pub mod tufe;
