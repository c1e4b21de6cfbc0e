pub mod health;
pub mod rbmq;
