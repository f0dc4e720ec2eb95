/// Ordered output columns: the key column first, then each other choice once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSelection {
    columns: Vec<String>,
}

impl OutputSelection {
    /// Builds a selection from the key column and the chosen columns in slot order.
    ///
    /// Blank choices are ignored and later repeats of a column are dropped.
    pub fn new<I, S>(key_column: &str, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns = vec![key_column.to_owned()];
        for choice in choices {
            let choice = choice.as_ref();
            if !choice.is_empty() && !columns.iter().any(|column| column == choice) {
                columns.push(choice.to_owned());
            }
        }
        OutputSelection { columns }
    }

    pub fn key_column(&self) -> &str {
        &self.columns[0]
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
