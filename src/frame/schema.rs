use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// Logical type of a frame column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Double,
    Long,
    String,
    Boolean,
    /// Dense vector of doubles, produced by the vector assembler
    Vector,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Double => "double",
            DataType::Long => "long",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Vector => "vector",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    data_type: DataType,
    nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// Ordered set of uniquely named fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema, failing if two fields share a name.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(Error::DuplicateColumn(field.name().to_string()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    /// Position of the field called `name`
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        self.index_of(name).map(|idx| &self.fields[idx])
    }

    /// Names of all fields with the given type, in schema order
    pub fn names_of_type(&self, data_type: DataType) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.data_type() == data_type)
            .map(|f| f.name().to_string())
            .collect()
    }
}

/// Renders the schema as a tree, the way `printSchema` does.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root")?;
        for field in &self.fields {
            writeln!(
                f,
                " |-- {}: {} (nullable = {})",
                field.name(),
                field.data_type(),
                field.nullable()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let fields = vec![
            Field::new("price", DataType::Double, true),
            Field::new("price", DataType::Long, true),
        ];
        assert!(matches!(
            Schema::new(fields),
            Err(Error::DuplicateColumn(name)) if name == "price"
        ));
    }

    #[test]
    fn prints_as_tree() {
        let schema = Schema::new(vec![
            Field::new("room_type", DataType::String, true),
            Field::new("price", DataType::Double, true),
        ])
        .unwrap();

        assert_eq!(
            schema.to_string(),
            "root\n |-- room_type: string (nullable = true)\n |-- price: double (nullable = true)\n"
        );
    }

    #[test]
    fn looks_up_fields_by_name() {
        let schema = Schema::new(vec![
            Field::new("bedrooms", DataType::Double, true),
            Field::new("room_type", DataType::String, true),
            Field::new("beds", DataType::Double, true),
        ])
        .unwrap();

        assert_eq!(schema.index_of("beds").unwrap(), 2);
        assert!(matches!(
            schema.index_of("bathrooms"),
            Err(Error::ColumnNotFound(_))
        ));
        assert_eq!(schema.names_of_type(DataType::Double), vec!["bedrooms", "beds"]);
    }
}
