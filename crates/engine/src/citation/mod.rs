//! Reference records and the formats they are exported in: APA strings,
//! RIS records and BibTeX entries.

pub mod apa;
pub mod bibtex;
pub mod reference;
pub mod ris;

pub use apa::format_apa;
pub use bibtex::generate_bibtex;
pub use reference::{in_text_citation, Reference};
pub use ris::generate_ris;
