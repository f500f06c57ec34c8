pub mod aes;
pub mod rsa;
