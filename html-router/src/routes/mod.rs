pub mod dashboard;
pub mod logs;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;
