use lambda_http::{Body, Error, Request, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{item_to_json, Patch, Producto, ID_FIELD};
use crate::store::ProductStore;

/// What the router needs from a gateway event.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProductRequest {
    pub(crate) method: Option<String>,
    pub(crate) body: Option<String>,
}

impl ProductRequest {
    fn from_event(event: &Request) -> Result<Self, ApiError> {
        let body = match event.body() {
            Body::Text(text) => Some(text.clone()),
            Body::Binary(bytes) => Some(String::from_utf8(bytes.clone()).map_err(|e| {
                ApiError::BadRequest(format!("El cuerpo no es UTF-8 válido: {}", e))
            })?),
            _ => None,
        };
        Ok(ProductRequest {
            method: Some(event.method().as_str().to_string()),
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    Json(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProductResponse {
    pub(crate) status: u16,
    pub(crate) payload: Payload,
}

impl ProductResponse {
    fn json(status: u16, body: String) -> Self {
        ProductResponse {
            status,
            payload: Payload::Json(body),
        }
    }

    fn text(status: u16, message: impl Into<String>) -> Self {
        ProductResponse {
            status,
            payload: Payload::Text(message.into()),
        }
    }

    fn into_response(self) -> Result<Response<Body>, Error> {
        let (content_type, body) = match self.payload {
            Payload::Json(body) => ("application/json", body),
            Payload::Text(body) => ("text/plain; charset=utf-8", body),
        };
        Ok(Response::builder()
            .status(self.status)
            .header("content-type", content_type)
            .body(Body::Text(body))?)
    }
}

fn require_body(body: Option<&str>) -> Result<&str, ApiError> {
    match body {
        Some(b) if !b.trim().is_empty() => Ok(b),
        _ => Err(ApiError::BadRequest(
            "El cuerpo de la solicitud está vacío.".to_string(),
        )),
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::BadRequest(format!("JSON inválido: {}", e)))
}

fn required_id(fields: &Map<String, Value>) -> Result<String, ApiError> {
    match fields.get(ID_FIELD) {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
        _ => Err(ApiError::missing_field(ID_FIELD)),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    !matches!(value, Some(v) if !v.trim().is_empty())
}

/// Full replace: the stored item becomes exactly what was sent.
async fn create_producto<S: ProductStore + ?Sized>(
    store: &S,
    body: Option<&str>,
) -> Result<ProductResponse, ApiError> {
    debug!(?body, "Cuerpo recibido en POST");
    let mut producto: Producto = parse_json(require_body(body)?)?;

    if is_blank(producto.nombre.as_deref()) {
        return Err(ApiError::missing_field("nombre"));
    }
    if is_blank(producto.id_producto.as_deref()) {
        producto.id_producto = Some(Uuid::new_v4().to_string());
    }
    // Empty sets are never stored, so they are not echoed either.
    if producto.historial_movimientos.as_ref().is_some_and(|s| s.is_empty()) {
        producto.historial_movimientos = None;
    }

    store
        .put(producto.to_item())
        .await
        .map_err(|e| ApiError::store("Error al crear producto", e))?;
    info!(id_producto = ?producto.id_producto, "Producto creado");

    let body = serde_json::to_string(&producto)
        .map_err(|e| ApiError::Internal(format!("Error al crear producto: {}", e)))?;
    Ok(ProductResponse::json(200, body))
}

async fn get_all_productos<S: ProductStore + ?Sized>(
    store: &S,
) -> Result<ProductResponse, ApiError> {
    let items = store
        .scan()
        .await
        .map_err(|e| ApiError::store("Error al obtener productos", e))?;
    debug!(count = items.len(), "Productos leídos");

    let productos: Vec<Value> = items
        .iter()
        .map(|item| Value::Object(item_to_json(item)))
        .collect();
    let body = serde_json::to_string(&productos)
        .map_err(|e| ApiError::Internal(format!("Error al obtener productos: {}", e)))?;
    Ok(ProductResponse::json(200, body))
}

/// Partial patch: attributes not named in the body are left as stored.
async fn modify_producto<S: ProductStore + ?Sized>(
    store: &S,
    body: Option<&str>,
) -> Result<ProductResponse, ApiError> {
    debug!(?body, "Cuerpo recibido en PUT");
    let fields: Map<String, Value> = parse_json(require_body(body)?)?;
    let id = required_id(&fields)?;

    let patch = Patch::from_fields(id, fields);
    if patch.is_empty() {
        return Err(ApiError::BadRequest(
            "No hay campos válidos para actualizar.".to_string(),
        ));
    }

    store
        .update_attributes(&patch)
        .await
        .map_err(|e| ApiError::store("Error al actualizar producto", e))?;
    info!(id_producto = %patch.id, fields = patch.clauses.len(), "Producto actualizado");

    Ok(ProductResponse::text(200, "Producto actualizado correctamente."))
}

async fn delete_producto<S: ProductStore + ?Sized>(
    store: &S,
    body: Option<&str>,
) -> Result<ProductResponse, ApiError> {
    debug!(?body, "Cuerpo recibido en DELETE");
    let fields: Map<String, Value> = parse_json(require_body(body)?)?;
    let id = required_id(&fields)?;

    let old = store
        .delete(&id)
        .await
        .map_err(|e| ApiError::store("Error al eliminar producto", e))?
        .ok_or_else(|| ApiError::NotFound(format!("Producto no encontrado: {}", id)))?;
    info!(id_producto = %id, "Producto eliminado");

    let body = serde_json::to_string(&item_to_json(&old))
        .map_err(|e| ApiError::Internal(format!("Error al eliminar producto: {}", e)))?;
    Ok(ProductResponse::json(200, body))
}

/// Dispatches on the HTTP method. Every failure comes back as a response.
pub(crate) async fn route<S: ProductStore + ?Sized>(
    store: &S,
    request: Option<ProductRequest>,
) -> ProductResponse {
    let request = match request {
        Some(r) => r,
        None => {
            error!("La solicitud recibida es NULL");
            return ProductResponse::text(500, "Error: La solicitud recibida es NULL");
        }
    };

    let method = request
        .method
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or("UNKNOWN");
    info!(method, "Método HTTP recibido");

    let body = request.body.as_deref();
    let result = match method {
        "POST" => create_producto(store, body).await,
        "GET" => get_all_productos(store).await,
        "PUT" => modify_producto(store, body).await,
        "DELETE" => delete_producto(store, body).await,
        other => Err(ApiError::UnsupportedMethod(other.to_string())),
    };

    result.unwrap_or_else(|err| failure(err, method))
}

fn failure(err: ApiError, method: &str) -> ProductResponse {
    let status = err.status();
    if status >= 500 {
        error!(status, error = %err, method, "Solicitud fallida");
    } else {
        warn!(status, error = %err, method, "Solicitud rechazada");
    }
    ProductResponse::text(status, err.to_string())
}

pub(crate) async fn function_handler<S: ProductStore + ?Sized>(
    store: &S,
    event: Request,
) -> Result<Response<Body>, Error> {
    let response = match ProductRequest::from_event(&event) {
        Ok(request) => route(store, Some(request)).await,
        Err(err) => failure(err, event.method().as_str()),
    };
    response.into_response()
}
