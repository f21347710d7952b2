//! Builder for Earth Engine expression graphs.
//!
//! The REST API evaluates a DAG serialised as `{"result": id, "values":
//! {id: node}}`. Nodes are interned under sequential ids and referenced with
//! `valueReference`; mapping functions reference their parameter with
//! `argumentReference`.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::{AreaOfInterest, BandExpr, BinaryOp, IndexDefinition, ObservationWindow};

/// Scene classification values removed before computing indices: cloud
/// shadow, cirrus, medium and high probability cloud.
pub(super) const MASKED_SCL_CLASSES: [u8; 4] = [3, 8, 9, 10];
/// Digital number to surface reflectance.
pub(super) const REFLECTANCE_SCALE: f64 = 0.0001;
const TIME_START: &str = "system:time_start";
const DATE_PATTERN: &str = "YYYY-MM-dd";

/// Serialisable expression graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct Expression {
    pub(super) result: String,
    pub(super) values: Map<String, Value>,
}

/// Accumulates interned nodes.
#[derive(Debug, Default)]
pub(super) struct GraphBuilder {
    values: Map<String, Value>,
    mapping_functions: usize,
}

pub(super) fn constant(value: impl Serialize) -> Value {
    json!({ "constantValue": value })
}

fn argument(name: &str) -> Value {
    json!({ "argumentReference": name })
}

fn dictionary(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    let values: Map<String, Value> = entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect();
    json!({ "dictionaryValue": { "values": values } })
}

impl GraphBuilder {
    pub(super) fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, node: Value) -> String {
        if let Some(id) = node.get("valueReference").and_then(Value::as_str) {
            return id.to_owned();
        }
        let id = self.values.len().to_string();
        self.values.insert(id.clone(), node);
        id
    }

    /// Invoke a server-side algorithm, returning a reference to its result.
    pub(super) fn invoke(
        &mut self,
        function: &str,
        arguments: impl IntoIterator<Item = (&'static str, Value)>,
    ) -> Value {
        let arguments: Map<String, Value> = arguments
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect();
        let id = self.intern(json!({
            "functionInvocationValue": {
                "functionName": function,
                "arguments": arguments,
            }
        }));
        json!({ "valueReference": id })
    }

    /// Define a one-argument mapping function whose body is built by `body`.
    pub(super) fn mapping_function(&mut self, body: impl FnOnce(&mut Self, Value) -> Value) -> Value {
        let name = format!("_MAPPING_VAR_{}_0", self.mapping_functions);
        self.mapping_functions += 1;
        let result = body(self, argument(&name));
        let body_id = self.intern(result);
        json!({
            "functionDefinitionValue": {
                "argumentNames": [name],
                "body": body_id,
            }
        })
    }

    pub(super) fn finish(mut self, result: Value) -> Expression {
        let result = self.intern(result);
        Expression {
            result,
            values: self.values,
        }
    }

    fn image_binary(&mut self, function: &'static str, lhs: Value, rhs: Value) -> Value {
        self.invoke(function, [("image1", lhs), ("image2", rhs)])
    }

    fn image_constant(&mut self, value: f64) -> Value {
        self.invoke("Image.constant", [("value", constant(value))])
    }

    fn select(&mut self, image: Value, band: &str) -> Value {
        self.invoke(
            "Image.select",
            [("input", image), ("bandSelectors", constant([band]))],
        )
    }

    /// Polygon geometry for the area of interest.
    pub(super) fn polygon(&mut self, aoi: &AreaOfInterest) -> Value {
        self.invoke(
            "GeometryConstructors.Polygon",
            [("coordinates", constant([aoi.to_pairs()]))],
        )
    }

    /// Geometry shrunk (negative) or grown (positive) by `metres`.
    pub(super) fn buffer(&mut self, geometry: Value, metres: f64) -> Value {
        self.invoke(
            "Geometry.buffer",
            [("geometry", geometry), ("distance", constant(metres))],
        )
    }

    /// Scenes intersecting `geometry` inside the window and below the cloud
    /// threshold.
    pub(super) fn filtered_collection(
        &mut self,
        collection_id: &str,
        geometry: Value,
        window: &ObservationWindow,
        cloud_threshold: f64,
    ) -> Value {
        let loaded = self.invoke("ImageCollection.load", [("id", constant(collection_id))]);

        let bounds = self.invoke(
            "Filter.intersects",
            [("leftField", constant(".all")), ("rightValue", geometry)],
        );
        let range = self.invoke(
            "DateRange",
            [
                ("start", constant(window.start_str())),
                ("end", constant(window.end_str())),
            ],
        );
        let dates = self.invoke(
            "Filter.dateRangeContains",
            [("leftValue", range), ("rightField", constant(TIME_START))],
        );
        let clouds = self.invoke(
            "Filter.lessThan",
            [
                ("leftField", constant("CLOUDY_PIXEL_PERCENTAGE")),
                ("rightValue", constant(cloud_threshold)),
            ],
        );
        let dated = self.invoke("Filter.notNull", [("properties", constant([TIME_START]))]);

        [bounds, dates, clouds, dated]
            .into_iter()
            .fold(loaded, |collection, filter| {
                self.invoke(
                    "Collection.filter",
                    [("collection", collection), ("filter", filter)],
                )
            })
    }

    /// Number of elements in a collection.
    pub(super) fn size(&mut self, collection: Value) -> Value {
        self.invoke("Collection.size", [("collection", collection)])
    }

    fn cloud_masked(&mut self, image: Value) -> Value {
        let scl = self.select(image.clone(), "SCL");
        let mut mask: Option<Value> = None;
        for class in MASKED_SCL_CLASSES {
            let class_image = self.image_constant(f64::from(class));
            let keep = self.image_binary("Image.neq", scl.clone(), class_image);
            mask = Some(match mask {
                Some(acc) => self.image_binary("Image.and", acc, keep),
                None => keep,
            });
        }
        match mask {
            Some(mask) => self.invoke("Image.updateMask", [("image", image), ("mask", mask)]),
            None => image,
        }
    }

    fn band_math(&mut self, scene: &Value, expr: &BandExpr) -> Value {
        match expr {
            BandExpr::Band(band) => self.select(scene.clone(), band.id()),
            BandExpr::Constant(value) => self.image_constant(*value),
            BandExpr::Binary { op, lhs, rhs } => {
                let lhs = self.band_math(scene, lhs);
                let rhs = self.band_math(scene, rhs);
                let function = match op {
                    BinaryOp::Add => "Image.add",
                    BinaryOp::Subtract => "Image.subtract",
                    BinaryOp::Multiply => "Image.multiply",
                    BinaryOp::Divide => "Image.divide",
                };
                self.image_binary(function, lhs, rhs)
            }
        }
    }

    /// Collection of single-band index images named after the index code,
    /// each keeping its acquisition time.
    pub(super) fn index_collection(&mut self, collection: Value, index: &IndexDefinition) -> Value {
        let code = index.name.code();
        let mapper = self.mapping_function(|graph, scene| {
            let masked = graph.cloud_masked(scene.clone());
            let scale = graph.image_constant(REFLECTANCE_SCALE);
            let scaled = graph.image_binary("Image.multiply", masked, scale);
            let value = graph.band_math(&scaled, &index.expression);
            let renamed = graph.invoke(
                "Image.rename",
                [("input", value), ("names", constant([code]))],
            );
            graph.invoke(
                "Element.copyProperties",
                [
                    ("destination", renamed),
                    ("source", scene),
                    ("properties", constant([TIME_START])),
                ],
            )
        });
        self.invoke(
            "Collection.map",
            [("collection", collection), ("baseAlgorithm", mapper)],
        )
    }

    /// Mean composite of an index collection clipped to `geometry`.
    pub(super) fn clipped_mean(&mut self, collection: Value, geometry: Value) -> Value {
        let mean = self.invoke("reduce.mean", [("collection", collection)]);
        self.invoke("Image.clip", [("input", mean), ("geometry", geometry)])
    }

    /// One feature per scene carrying `date` and the regional mean `value`.
    pub(super) fn regional_means(
        &mut self,
        collection: Value,
        geometry: Value,
        code: &str,
        scale_m: f64,
    ) -> Value {
        let code = code.to_owned();
        let mapper = self.mapping_function(|graph, scene| {
            let reducer = graph.invoke("Reducer.mean", Vec::<(&'static str, Value)>::new());
            let stats = graph.invoke(
                "Image.reduceRegion",
                [
                    ("image", scene.clone()),
                    ("reducer", reducer),
                    ("geometry", geometry),
                    ("scale", constant(scale_m)),
                    ("bestEffort", constant(true)),
                    ("maxPixels", constant(1e9)),
                ],
            );
            let value = graph.invoke(
                "Dictionary.get",
                [("dictionary", stats), ("key", constant(&code))],
            );
            let time = graph.invoke(
                "Element.get",
                [("object", scene), ("property", constant(TIME_START))],
            );
            let date = graph.invoke("Date", [("value", time)]);
            let formatted = graph.invoke(
                "Date.format",
                [("date", date), ("format", constant(DATE_PATTERN))],
            );
            graph.invoke(
                "Feature",
                [
                    ("geometry", constant(Value::Null)),
                    ("metadata", dictionary([("date", formatted), ("value", value)])),
                ],
            )
        });
        self.invoke(
            "Collection.map",
            [("collection", collection), ("baseAlgorithm", mapper)],
        )
    }
}
