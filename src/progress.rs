/// Observer told about each document once it has been read, in upload
/// order. `index` is 1-based.
pub trait Progress {
    fn document_read(&mut self, index: usize, total: usize, filename: &str);
}

impl<F> Progress for F
where
    F: FnMut(usize, usize, &str),
{
    fn document_read(&mut self, index: usize, total: usize, filename: &str) {
        self(index, total, filename);
    }
}

/// Progress observer that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn document_read(&mut self, _index: usize, _total: usize, _filename: &str) {}
}
