//! # roledesk CLI
//!
//! Terminal front end for the role editor.
//!
//! The binary drives an [`roledesk::EditorSession`] through `dialoguer`
//! prompts. This library crate holds the parts that do not need a terminal:
//! text rendering and demo-data seeding.
//!
//! ## Usage
//!
//! ```ignore
//! use roledesk_cli::seeder::seed_demo_roles;
//!
//! let created = seed_demo_roles(&registry, &catalog, &engine, 10).await?;
//! ```

pub mod render;
pub mod seeder;
