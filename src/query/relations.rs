//! Joins between entities

use crate::error::QueryConstructionError;

use super::model::Predicate;
use super::renderer::SqlRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinHint {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinHint {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinHint::Inner => "INNER JOIN",
            JoinHint::Left => "LEFT JOIN",
            JoinHint::Right => "RIGHT JOIN",
        }
    }

    /// The same join seen from the other side
    pub fn mirrored(self) -> Self {
        match self {
            JoinHint::Inner => JoinHint::Inner,
            JoinHint::Left => JoinHint::Right,
            JoinHint::Right => JoinHint::Left,
        }
    }
}

/// Cardinality seen from the start entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToOne,
}

/// One side of a relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEnd {
    pub schema_name: String,
    pub object_name: String,
    pub alias: Option<String>,
}

impl RelationEnd {
    pub fn new(schema_name: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            object_name: object_name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Alias if set, else the qualified object name; used to tell entities apart
    pub(crate) fn identity(&self) -> String {
        match self.alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_string(),
            None => format!("{}.{}", self.schema_name, self.object_name),
        }
    }
}

/// A join between two entities
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRelation {
    pub start: RelationEnd,
    pub end: RelationEnd,
    /// (start column, end column) pairs
    pub field_pairs: Vec<(String, String)>,
    pub relation_type: RelationType,
    pub join_hint: JoinHint,
    pub custom_filter: Option<Predicate>,
}

impl EntityRelation {
    pub fn new(start: RelationEnd, end: RelationEnd, relation_type: RelationType) -> Self {
        Self {
            start,
            end,
            field_pairs: Vec::new(),
            relation_type,
            join_hint: JoinHint::default(),
            custom_filter: None,
        }
    }

    pub fn on(mut self, start_column: impl Into<String>, end_column: impl Into<String>) -> Self {
        self.field_pairs.push((start_column.into(), end_column.into()));
        self
    }

    pub fn with_join_hint(mut self, hint: JoinHint) -> Self {
        self.join_hint = hint;
        self
    }

    pub fn with_custom_filter(mut self, filter: Predicate) -> Self {
        self.custom_filter = Some(filter);
        self
    }

    /// True when joining can return the start entity more than once
    pub fn may_produce_duplicates(&self) -> bool {
        match self.relation_type {
            RelationType::OneToMany => true,
            RelationType::ManyToOne => self.join_hint == JoinHint::Right,
            RelationType::OneToOne => false,
        }
    }
}

/// Ordered set of relations forming a FROM clause
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationCollection {
    relations: Vec<EntityRelation>,
}

impl RelationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, relation: EntityRelation) -> &mut Self {
        self.relations.push(relation);
        self
    }

    pub fn with(mut self, relation: EntityRelation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRelation> {
        self.relations.iter()
    }

    pub fn may_produce_duplicates(&self) -> bool {
        self.relations.iter().any(EntityRelation::may_produce_duplicates)
    }

    /// Join text for a FROM clause. Parameters of custom filters are added to
    /// the renderer's collector.
    pub fn to_query_text(&self, renderer: &mut SqlRenderer<'_>) -> Result<String, QueryConstructionError> {
        let mut text = String::new();
        let mut joined: Vec<String> = Vec::new();

        for relation in &self.relations {
            if joined.is_empty() {
                text.push_str(&renderer.relation_end(&relation.start));
                joined.push(relation.start.identity());
            }
            // join whichever side isn't part of the FROM clause yet
            let start_id = relation.start.identity();
            let (new_side, join_hint) = if joined.contains(&start_id) {
                (&relation.end, relation.join_hint)
            } else {
                // the start entity ends up on the right of the JOIN keyword
                (&relation.start, relation.join_hint.mirrored())
            };
            joined.push(new_side.identity());

            text.push(' ');
            text.push_str(join_hint.as_sql());
            text.push(' ');
            text.push_str(&renderer.relation_end(new_side));
            text.push_str(" ON ");

            let conditions: Vec<String> = relation
                .field_pairs
                .iter()
                .map(|(start_column, end_column)| {
                    format!(
                        "{}={}",
                        renderer.relation_column(&relation.start, start_column),
                        renderer.relation_column(&relation.end, end_column)
                    )
                })
                .collect();
            text.push_str(&conditions.join(" AND "));

            if let Some(filter) = &relation.custom_filter {
                let filter_text = renderer.predicate(filter)?;
                if !filter_text.is_empty() {
                    text.push_str(" AND (");
                    text.push_str(&filter_text);
                    text.push(')');
                }
            }
        }
        Ok(text)
    }
}
