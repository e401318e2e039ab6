// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const PAGE_SIZE: usize = 20;

pub const fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Records shown on a 1-based `page`. Out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let Some(start) = page.checked_sub(1).map(|index| index * PAGE_SIZE) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl Pager {
    pub const fn page(self) -> usize {
        self.page
    }

    pub const fn has_prev(self) -> bool {
        self.page > 1
    }

    pub const fn has_next(self, total: usize) -> bool {
        self.page < page_count(total)
    }

    pub fn next(&mut self, total: usize) -> bool {
        if !self.has_next(total) {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn clamp(&mut self, total: usize) {
        self.page = self.page.min(page_count(total)).max(1);
    }

    pub fn label(self, total: usize) -> String {
        format!("page {} of {}", self.page, page_count(total).max(1))
    }
}
