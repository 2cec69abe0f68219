pub mod restaurants;
