//! Serialization and deserialization of annotations.
//!
//! An annotation is written as its id, kind and data. Reading it back yields an annotation equal to the original,
//! because equality is by id.

use serde::{ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

use crate::SyntaxAnnotation;

impl Serialize for SyntaxAnnotation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("SyntaxAnnotation", 3)?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("data", &self.data())?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(rename = "SyntaxAnnotation")]
struct AnnotationRepr {
    id:   u64,
    kind: Option<String>,
    data: Option<String>,
}

impl<'de> Deserialize<'de> for SyntaxAnnotation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let AnnotationRepr { id, kind, data } = AnnotationRepr::deserialize(deserializer)?;
        Ok(SyntaxAnnotation::from_raw_parts(id, kind.as_deref(), data.as_deref()))
    }
}
