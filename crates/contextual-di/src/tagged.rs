use crate::error::Error;
use crate::value::{Parameters, Value};
use crate::Container;
use std::vec;

/// The abstracts under a tag, resolved lazily.
///
/// Every call to [`Tagged::iter`] reads the tag's membership afresh and
/// resolves each abstract only as the iterator reaches it.
#[derive(Debug, Clone)]
pub struct Tagged<'c> {
    container: &'c Container,
    tag: String,
}

impl<'c> Tagged<'c> {
    pub(crate) fn new(container: &'c Container, tag: &str) -> Self {
        Tagged {
            container,
            tag: tag.to_string(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn len(&self) -> usize {
        self.container
            .read(|r| r.tags.get(&self.tag).map(Vec::len).unwrap_or(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> TaggedIter<'c> {
        let abstracts = self
            .container
            .read(|r| r.tags.get(&self.tag).cloned().unwrap_or_default());
        TaggedIter {
            container: self.container,
            abstracts: abstracts.into_iter(),
        }
    }
}

impl<'a, 'c> IntoIterator for &'a Tagged<'c> {
    type Item = Result<Value, Error>;
    type IntoIter = TaggedIter<'c>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct TaggedIter<'c> {
    container: &'c Container,
    abstracts: vec::IntoIter<String>,
}

impl Iterator for TaggedIter<'_> {
    type Item = Result<Value, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let abstract_ = self.abstracts.next()?;
        Some(self.container.make_any(&abstract_, Parameters::new()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.abstracts.size_hint()
    }
}

impl ExactSizeIterator for TaggedIter<'_> {}
