//! Column path reading and validation.
//!
//! A path is read hop by hop: every column but the last must yield a row id of
//! the next column's input table. A `Null` or unresolved hop short-circuits the
//! whole path to `Null`.

use crate::definition::ColumnPath;
use crate::schema::Schema;
use alloc::format;
use alloc::vec::Vec;
use colflow_core::{ColumnId, ColumnType, DefinitionError, RowId, TableId, Value};

impl Schema {
    /// Reads the value at the end of `path` for row `id` of the path's anchor table.
    pub(crate) fn read_path(&self, path: &[ColumnId], id: RowId) -> Value {
        let Some((last, hops)) = path.split_last() else {
            return Value::Null;
        };
        let mut row = id;
        for &column in hops {
            match self.columns[column].data.get(row).as_row_id() {
                Some(next) => row = next,
                None => return Value::Null,
            }
        }
        self.columns[*last].data.get(row).clone()
    }

    /// Reads every path at row `id` into `out`, replacing its contents.
    pub(crate) fn read_params(&self, paths: &[ColumnPath], id: RowId, out: &mut Vec<Value>) {
        out.clear();
        out.extend(paths.iter().map(|path| self.read_path(path, id)));
    }

    /// Checks that `path` chains from `anchor` and returns its final output type.
    pub(crate) fn validate_path(
        &self,
        anchor: TableId,
        path: &[ColumnId],
    ) -> Result<ColumnType, DefinitionError> {
        let Some((&last, hops)) = path.split_last() else {
            return Err(DefinitionError::invalid_path("empty column path"));
        };
        let mut table = anchor;
        for &column in hops {
            let col = self.path_step(table, column)?;
            table = col.output.table().ok_or_else(|| {
                DefinitionError::invalid_path(format!(
                    "column {} outputs a primitive value but the path continues",
                    col.name
                ))
            })?;
        }
        Ok(self.path_step(table, last)?.output)
    }

    /// Like [`validate_path`](Self::validate_path) but the path must end in a primitive value.
    pub(crate) fn validate_value_path(
        &self,
        anchor: TableId,
        path: &[ColumnId],
    ) -> Result<ColumnType, DefinitionError> {
        let output = self.validate_path(anchor, path)?;
        if !output.is_primitive() {
            return Err(DefinitionError::invalid_path(format!(
                "path {:?} ends in row ids, not a value",
                path
            )));
        }
        Ok(output)
    }

    fn path_step(
        &self,
        table: TableId,
        column: ColumnId,
    ) -> Result<&crate::schema::Column, DefinitionError> {
        let col = self.columns.get(column).ok_or_else(|| {
            DefinitionError::invalid_path(format!("column {} does not exist", column))
        })?;
        if col.input != table {
            return Err(DefinitionError::invalid_path(format!(
                "column {} belongs to table {}, expected table {}",
                col.name, col.input, table
            )));
        }
        Ok(col)
    }
}

#[cfg(test)]
mod tests {
    use crate::Schema;
    use colflow_core::{ColumnType, DataType, DefinitionError, Value};

    fn two_tables() -> (Schema, usize, usize, usize) {
        let mut schema = Schema::new();
        let cities = schema.create_table("cities");
        let people = schema.create_table("people");
        let name = schema
            .create_column(cities, "name", ColumnType::Primitive(DataType::String))
            .unwrap();
        let city = schema
            .create_column(people, "city", ColumnType::Table(cities))
            .unwrap();
        schema.add(cities, 2).unwrap();
        schema.add(people, 3).unwrap();
        schema
            .set_values(name, 0, [Value::from("Oslo"), Value::from("Lima")])
            .unwrap();
        schema
            .set_values(city, 0, [Value::Int64(1), Value::Int64(-1), Value::Int64(0)])
            .unwrap();
        (schema, people, city, name)
    }

    #[test]
    fn test_read_path_follows_links() {
        let (schema, _, city, name) = two_tables();
        assert_eq!(schema.read_path(&[city, name], 0), Value::from("Lima"));
        assert_eq!(schema.read_path(&[city, name], 2), Value::from("Oslo"));
        assert_eq!(schema.read_path(&[city], 0), Value::Int64(1));
    }

    #[test]
    fn test_read_path_unresolved_is_null() {
        let (schema, _, city, name) = two_tables();
        assert_eq!(schema.read_path(&[city, name], 1), Value::Null);
        assert_eq!(schema.read_path(&[], 0), Value::Null);
    }

    #[test]
    fn test_validate_path() {
        let (schema, people, city, name) = two_tables();
        assert_eq!(
            schema.validate_path(people, &[city, name]),
            Ok(ColumnType::Primitive(DataType::String))
        );
        assert!(schema.validate_value_path(people, &[city]).is_err());
        assert!(matches!(
            schema.validate_path(people, &[name]),
            Err(DefinitionError::InvalidPath { .. })
        ));
        assert!(schema.validate_path(people, &[city, name, name]).is_err());
        assert!(schema.validate_path(people, &[]).is_err());
        assert!(schema.validate_path(people, &[42]).is_err());
    }
}
