//! HTTP Cookies

use std::fmt;
use std::slice;

/// A single HTTP cookie.
pub type Cookie = cookie_crate::Cookie<'static>;

/// The cookies attached to a request, in the order they were added.
///
/// Names are not unique: [`Cookies::add`] keeps duplicates, while
/// [`Cookies::add_or_replace`] overwrites the first cookie of the same name.
#[derive(Clone, Default, PartialEq)]
pub struct Cookies {
    list: Vec<Cookie>,
}

impl Cookies {
    /// An empty list.
    pub fn new() -> Cookies {
        Cookies::default()
    }

    /// Append a cookie unconditionally.
    pub fn add(&mut self, cookie: Cookie) {
        self.list.push(cookie);
    }

    /// Replace the first cookie named like `cookie`, keeping its position,
    /// or append it when there is none.
    pub fn add_or_replace(&mut self, cookie: Cookie) {
        match self.list.iter().position(|c| c.name() == cookie.name()) {
            Some(index) => self.list[index] = cookie,
            None => self.list.push(cookie),
        }
    }

    /// Remove all cookies.
    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Number of cookies.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns true if there are no cookies.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, Cookie> {
        self.list.iter()
    }

    /// View as a slice.
    pub fn as_slice(&self) -> &[Cookie] {
        &self.list
    }

    /// Render the `Cookie` request header value, `name=value` pairs joined
    /// by `; `. Returns `None` when there are no cookies.
    pub fn header_value(&self) -> Option<String> {
        if self.list.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .list
            .iter()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect();
        Some(pairs.join("; "))
    }
}

impl From<Vec<Cookie>> for Cookies {
    fn from(list: Vec<Cookie>) -> Cookies {
        Cookies { list }
    }
}

impl FromIterator<Cookie> for Cookies {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Cookies {
        Cookies {
            list: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Cookies {
    type Item = &'a Cookie;
    type IntoIter = slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

impl fmt::Debug for Cookies {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.list.iter()).finish()
    }
}
