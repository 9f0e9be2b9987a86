//! Cross-component tests: generated documents pushed through the writer
//! and pulled back out of the reader.
