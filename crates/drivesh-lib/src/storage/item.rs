use std::fmt;

/// One entry of a backend namespace.
///
/// Remote items are identified by the server-assigned id. Local items use the
/// entry name as id and the containing directory's full path as parent id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    name: String,
    id: String,
    parent_id: String,
    is_directory: bool,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        parent_id: impl Into<String>,
        is_directory: bool,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            parent_id: parent_id.into(),
            is_directory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn set_parent_id(&mut self, parent_id: impl Into<String>) {
        self.parent_id = parent_id.into();
    }

    pub fn set_is_directory(&mut self, is_directory: bool) {
        self.is_directory = is_directory;
    }
}

/// Listing format used by the `list` command.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "\tID: {}", self.id)?;
        writeln!(f, "\tParent: {}", self.parent_id)?;
        write!(f, "\tDirectory: {}", self.is_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters() {
        let mut item = Item::new("a.txt", "F1", "R", false);
        item.set_name("b.txt");
        item.set_id("F2");
        item.set_parent_id("D1");
        item.set_is_directory(true);
        assert_eq!(item, Item::new("b.txt", "F2", "D1", true));
    }

    #[test]
    fn test_display_format() {
        let item = Item::new("Saves", "D1", "R", true);
        assert_eq!(
            item.to_string(),
            "Saves:\n\tID: D1\n\tParent: R\n\tDirectory: true"
        );
    }
}
