use glob::Pattern;
use glob::PatternError;

/// One entry of a sheet selection.
#[derive(Clone, Debug)]
pub enum SheetSelector {
    /// Exact sheet name; loading fails when the workbook has no such sheet.
    Name(String),
    /// Glob pattern; may match any number of sheets.
    Pattern(Pattern),
}

impl SheetSelector {
    /// Reads an entry as a glob pattern when it contains glob metacharacters.
    pub fn parse(entry: &str) -> Result<Self, PatternError> {
        if entry.contains(['*', '?', '[']) {
            Ok(SheetSelector::Pattern(Pattern::new(entry)?))
        } else {
            Ok(SheetSelector::Name(entry.to_owned()))
        }
    }

    fn matches(&self, sheet_name: &str) -> bool {
        match self {
            SheetSelector::Name(name) => name == sheet_name,
            SheetSelector::Pattern(pattern) => pattern.matches(sheet_name),
        }
    }
}

/// Which sheets of a workbook to load.
///
/// Sheets are always visited in workbook order, whatever the order of the selectors.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// `None` selects every sheet, an empty list selects none.
    selectors: Option<Vec<SheetSelector>>,
}

impl Criteria {
    /// Selects every sheet of the workbook.
    pub fn all() -> Self {
        Criteria { selectors: None }
    }

    /// Selects sheets by exact name.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criteria {
            selectors: Some(names.into_iter().map(|name| SheetSelector::Name(name.into())).collect()),
        }
    }

    pub fn from_selectors(selectors: Vec<SheetSelector>) -> Self {
        Criteria { selectors: Some(selectors) }
    }

    /// Selects sheets by name, treating entries containing glob metacharacters as patterns.
    pub fn parse<I, S>(entries: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selectors = entries
            .into_iter()
            .map(|entry| SheetSelector::parse(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Criteria { selectors: Some(selectors) })
    }

    /// Checks if a sheet name is selected.
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        match &self.selectors {
            Some(selectors) => selectors.iter().any(|selector| selector.matches(sheet_name)),
            None => true,
        }
    }

    /// Exact names requested by this selection.
    pub(crate) fn required_names(&self) -> Vec<&str> {
        self.selectors
            .iter()
            .flatten()
            .filter_map(|selector| match selector {
                SheetSelector::Name(name) => Some(name.as_str()),
                SheetSelector::Pattern(_) => None,
            })
            .collect()
    }
}
