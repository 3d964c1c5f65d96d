pub mod client_ip;
pub mod id_generator;
