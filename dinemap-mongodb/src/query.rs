//! Translation from directory filter/update descriptors to MongoDB syntax.
//!
//! Filter expressions become native query documents via the visitor; update
//! descriptors become `$inc`/`$set` documents; geo-radius descriptors become
//! a single-stage `$geoNear` aggregation pipeline.

use bson::{Bson, Document, doc};

use dinemap_core::{
    error::StoreError,
    geo::GeoNear,
    query::{Expr, FieldOp, QueryVisitor},
    update::{Update, UpdateOp},
};

/// Translates filter expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::MatchesCi => match value {
                    Bson::String(pattern) => doc! { "$regex": pattern.as_str(), "$options": "i" },
                    _ => return Err(StoreError::InvalidArgument(
                        "MatchesCi operator requires a string pattern".to_string(),
                    )),
                },
                FieldOp::In => match value {
                    Bson::Array(_) => doc! { "$in": value },
                    _ => return Err(StoreError::InvalidArgument(
                        "In operator requires an array of values".to_string(),
                    )),
                },
            }
        })
    }
}

/// Translates a filter expression into a query document; `None` becomes the
/// match-everything document.
pub(crate) fn translate_filter(filter: Option<&Expr>) -> Result<Document, StoreError> {
    match filter {
        Some(expr) => MongoQueryTranslator.visit_expr(expr),
        None => Ok(doc! {}),
    }
}

/// Translates an update descriptor into a `$inc`/`$set` update document.
pub(crate) fn translate_update(update: &Update) -> Document {
    let mut increments = Document::new();
    let mut sets = Document::new();

    for op in &update.ops {
        match op {
            UpdateOp::Inc(field, delta) => {
                increments.insert(field.clone(), Bson::Int64(*delta));
            }
            UpdateOp::Set(field, value) => {
                sets.insert(field.clone(), value.clone());
            }
        }
    }

    let mut translated = Document::new();
    if !increments.is_empty() {
        translated.insert("$inc", increments);
    }
    if !sets.is_empty() {
        translated.insert("$set", sets);
    }

    translated
}

/// Builds the `$geoNear` stage for a geo-radius query.
///
/// `$geoNear` must be the first (and here, only) pipeline stage; the server
/// computes spherical distances in meters, annotates each result under the
/// configured distance field (scaled by the multiplier), and returns matches
/// nearest-first.
pub(crate) fn geo_near_stage(near: &GeoNear) -> Result<Document, StoreError> {
    Ok(doc! {
        "$geoNear": {
            "key": near.key.clone(),
            "spherical": near.spherical,
            "near": Bson::from(near.center.clone()),
            "query": translate_filter(near.filter.as_ref())?,
            "maxDistance": near.max_distance_m,
            "distanceField": near.distance_field.clone(),
            "distanceMultiplier": near.distance_multiplier,
        }
    })
}
