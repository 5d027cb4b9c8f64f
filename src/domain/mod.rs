// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the pipeline
// moves around, independent of Burn and of the filesystem.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One decoded, resized image in channel-first f32 layout
pub mod sample;

// Abstractions the other layers implement
pub mod traits;
