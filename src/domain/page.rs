/// Page size the service applies when a filter does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One page of a listing.
pub struct Page<T> {
    /// Zero-based page index.
    pub page: u32,
    /// Number of entries on this page.
    pub page_size: u32,
    /// Number of entries matching the filter across all pages.
    pub total_size: u32,
    pub num_pages: u32,
    pub content: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page; `requested_page_size` is the page size the listing was
    /// fetched with and determines `num_pages`.
    pub fn new(
        page: u32,
        page_size: u32,
        total_size: u32,
        requested_page_size: u32,
        content: Vec<T>,
    ) -> Self {
        Self {
            page,
            page_size,
            total_size,
            num_pages: total_size.div_ceil(requested_page_size.max(1)),
            content,
        }
    }

    pub fn is_last(&self) -> bool {
        self.page.saturating_add(1) >= self.num_pages
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}
