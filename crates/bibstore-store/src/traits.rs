use bibstore_types::Reference;

/// Anything that can render itself as a BibTeX text block.
///
/// The store never looks inside a rendering: it writes each one verbatim, so
/// separators between entries are the renderer's responsibility.
pub trait BibtexEntry {
    /// The canonical BibTeX text for this entry.
    fn to_bibtex(&self) -> String;
}

impl BibtexEntry for Reference {
    fn to_bibtex(&self) -> String {
        Reference::to_bibtex(self)
    }
}

impl BibtexEntry for str {
    fn to_bibtex(&self) -> String {
        self.to_owned()
    }
}

impl BibtexEntry for String {
    fn to_bibtex(&self) -> String {
        self.clone()
    }
}

impl<T: BibtexEntry + ?Sized> BibtexEntry for &T {
    fn to_bibtex(&self) -> String {
        (**self).to_bibtex()
    }
}
