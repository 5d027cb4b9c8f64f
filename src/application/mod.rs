// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Wires the other layers together for a training run.
//
// Rules for this layer:
//   - No tensor math here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination and config validation
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

pub mod train_use_case;
