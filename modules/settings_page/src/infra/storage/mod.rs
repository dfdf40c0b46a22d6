//! Storage layer - option stores, database entities and migrations

pub mod entity;
pub mod mapper;
pub mod memory;
pub mod migrations;
pub mod repositories;
