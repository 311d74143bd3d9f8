/*!
 * Reassembly of translated batches into the final document.
 */

/// Joins translated batch texts with the paragraph delimiter
pub struct Assembler<'a> {
    delimiter: &'a str,
}

impl<'a> Assembler<'a> {
    pub fn new(delimiter: &'a str) -> Self {
        Self { delimiter }
    }

    /// Concatenate the translated parts in emission order
    pub fn assemble<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let mut document = String::with_capacity(
            parts.iter().map(|p| p.as_ref().len() + self.delimiter.len()).sum(),
        );

        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                document.push_str(self.delimiter);
            }
            document.push_str(part.as_ref());
        }

        document
    }
}
