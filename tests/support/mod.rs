#![allow(dead_code)]

pub mod handlabel_env;
pub mod tables;
