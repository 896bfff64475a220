use aws_sdk_dynamodb::types::AttributeValue;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeSet, HashMap};

pub(crate) const ID_FIELD: &str = "id_producto";

pub(crate) type Item = HashMap<String, AttributeValue>;

/// Product as accepted by Create. Absent attributes are never written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Producto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id_producto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) fabricante: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) estado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) numero_serie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) responsable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) ubicacion_actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id_coleccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) costo_adquisicion: Option<f64>,
    #[serde(
        default,
        deserialize_with = "integral",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) vida_util: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) fecha_adquisicion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) ultima_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) historial_movimientos: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) precio: Option<f64>,
    #[serde(
        default,
        deserialize_with = "integral",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) cantidad: Option<i64>,
}

// Integer fields also take floats with no fractional part, e.g. `5.0`.
fn integral<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let number = match Option::<Number>::deserialize(deserializer)? {
        Some(n) => n,
        None => return Ok(None),
    };
    number
        .as_i64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        })
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("expected an integer, found {}", number)))
}

impl Producto {
    pub(crate) fn to_item(&self) -> Item {
        let mut item = HashMap::new();

        let strings = [
            (ID_FIELD, &self.id_producto),
            ("nombre", &self.nombre),
            ("descripcion", &self.descripcion),
            ("categoria", &self.categoria),
            ("fabricante", &self.fabricante),
            ("estado", &self.estado),
            ("numero_serie", &self.numero_serie),
            ("responsable", &self.responsable),
            ("ubicacion_actual", &self.ubicacion_actual),
            ("id_coleccion", &self.id_coleccion),
            ("fecha_adquisicion", &self.fecha_adquisicion),
            ("ultima_version", &self.ultima_version),
        ];
        for (name, value) in strings {
            if let Some(v) = value {
                item.insert(name.to_string(), AttributeValue::S(v.clone()));
            }
        }

        let numbers = [
            ("costo_adquisicion", self.costo_adquisicion.map(|n| n.to_string())),
            ("vida_util", self.vida_util.map(|n| n.to_string())),
            ("precio", self.precio.map(|n| n.to_string())),
            ("cantidad", self.cantidad.map(|n| n.to_string())),
        ];
        for (name, value) in numbers {
            if let Some(n) = value {
                item.insert(name.to_string(), AttributeValue::N(n));
            }
        }

        // DynamoDB rejects empty string sets.
        if let Some(movimientos) = &self.historial_movimientos {
            if !movimientos.is_empty() {
                item.insert(
                    "historial_movimientos".to_string(),
                    AttributeValue::Ss(movimientos.iter().cloned().collect()),
                );
            }
        }

        item
    }
}

/// S and N become strings, non-empty SS becomes an array, anything else is dropped.
pub(crate) fn item_to_json(item: &Item) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, attribute) in item {
        let value = match attribute {
            AttributeValue::S(s) => Value::String(s.clone()),
            AttributeValue::N(n) => Value::String(n.clone()),
            AttributeValue::Ss(set) if !set.is_empty() => {
                Value::Array(set.iter().cloned().map(Value::String).collect())
            }
            _ => continue,
        };
        map.insert(key.clone(), value);
    }
    map
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    Text(String),
    Number(Number),
    Flag(bool),
    Unsupported,
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => FieldValue::Number(n),
            Value::Bool(b) => FieldValue::Flag(b),
            Value::Null | Value::Array(_) | Value::Object(_) => FieldValue::Unsupported,
        }
    }
}

impl FieldValue {
    pub(crate) fn into_attribute(self) -> Option<AttributeValue> {
        match self {
            FieldValue::Text(s) => Some(AttributeValue::S(s)),
            FieldValue::Number(n) => Some(AttributeValue::N(n.to_string())),
            FieldValue::Flag(b) => Some(AttributeValue::Bool(b)),
            FieldValue::Unsupported => None,
        }
    }
}

/// One `#fieldN = :valN` assignment of an update expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UpdateClause {
    pub(crate) name_placeholder: String,
    pub(crate) value_placeholder: String,
    pub(crate) attribute: String,
    pub(crate) value: AttributeValue,
}

/// Partial update of a single product: only the listed attributes change.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Patch {
    pub(crate) id: String,
    pub(crate) clauses: Vec<UpdateClause>,
}

impl Patch {
    // Placeholders are numbered over the clauses that survive filtering.
    pub(crate) fn from_fields(id: String, fields: Map<String, Value>) -> Self {
        let clauses = fields
            .into_iter()
            .filter(|(key, _)| key != ID_FIELD)
            .filter_map(|(key, value)| {
                FieldValue::from(value)
                    .into_attribute()
                    .map(|attribute| (key, attribute))
            })
            .enumerate()
            .map(|(i, (attribute, value))| UpdateClause {
                name_placeholder: format!("#field{}", i + 1),
                value_placeholder: format!(":val{}", i + 1),
                attribute,
                value,
            })
            .collect();
        Patch { id, clauses }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub(crate) fn expression(&self) -> String {
        let assignments: Vec<String> = self
            .clauses
            .iter()
            .map(|c| format!("{} = {}", c.name_placeholder, c.value_placeholder))
            .collect();
        format!("SET {}", assignments.join(", "))
    }
}
