use serde::Serialize;

/// Where a page sits inside a paginated listing, for the pager controls.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub previous_page: Option<usize>,
    pub next_page: Option<usize>,
    /// 1-based index of the first item shown; 0 when the page is empty.
    pub first_shown: usize,
    pub last_shown: usize,
}

impl Pagination {
    fn compute(requested: Option<usize>, per_page: usize, total_items: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page);
        let current_page = requested.unwrap_or(1).clamp(1, total_pages.max(1));
        let offset = per_page * (current_page - 1);
        let shown = total_items.saturating_sub(offset).min(per_page);

        Self {
            current_page,
            per_page,
            total_items,
            total_pages,
            previous_page: (current_page > 1 && total_pages > 0).then(|| current_page - 1),
            next_page: (current_page < total_pages).then(|| current_page + 1),
            first_shown: if shown == 0 { 0 } else { offset + 1 },
            last_shown: offset + shown,
        }
    }

    fn offset(&self) -> usize {
        self.per_page * (self.current_page - 1)
    }
}

/// Slices `items` down to the requested page. Out-of-range pages clamp to the
/// nearest existing one.
pub fn paginate_items<T>(
    items: Vec<T>,
    requested_page: Option<usize>,
    per_page: usize,
) -> (Vec<T>, Pagination) {
    let pagination = Pagination::compute(requested_page, per_page, items.len());
    let page = items
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.per_page)
        .collect();
    (page, pagination)
}

#[cfg(test)]
mod tests {
    use super::paginate_items;

    #[test]
    fn middle_page_of_log_listing() {
        let logs: Vec<_> = (1..=60).collect();
        let (page, meta) = paginate_items(logs, Some(2), 25);

        assert_eq!(page.first(), Some(&26));
        assert_eq!(page.len(), 25);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.previous_page, Some(1));
        assert_eq!(meta.next_page, Some(3));
        assert_eq!((meta.first_shown, meta.last_shown), (26, 50));
    }

    #[test]
    fn empty_listing_has_single_empty_page() {
        let (page, meta) = paginate_items(Vec::<u8>::new(), Some(4), 25);

        assert!(page.is_empty());
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.previous_page, None);
        assert_eq!(meta.next_page, None);
        assert_eq!((meta.first_shown, meta.last_shown), (0, 0));
    }

    #[test]
    fn page_zero_and_overflow_are_clamped() {
        let items: Vec<_> = (1..=5).collect();

        let (first, meta) = paginate_items(items.clone(), Some(0), 2);
        assert_eq!(first, vec![1, 2]);
        assert_eq!(meta.current_page, 1);

        let (last, meta) = paginate_items(items, Some(10), 2);
        assert_eq!(last, vec![5]);
        assert_eq!(meta.current_page, 3);
        assert_eq!(meta.next_page, None);
        assert_eq!((meta.first_shown, meta.last_shown), (5, 5));
    }
}
