// demos/storefront_client/src/render.rs

//! es-AR presentation of purchases, states and classified errors.

use chrono::NaiveDateTime;
use ventas::{ClassifiedError, Money, PurchaseDetail, PurchaseState, PurchaseSummary, PurchaseViewState, ResolutionPhase};

pub fn status_label(state: &PurchaseState) -> &'static str {
  match state {
    PurchaseState::Pending => "Pendiente",
    PurchaseState::Confirmed => "Confirmada",
    PurchaseState::Rejected => "Rechazada",
    PurchaseState::Unknown(_) => "Desconocido",
  }
}

/// Message for a rejected purchase, keyed by `motivoRechazo`.
pub fn rejection_message(reason: Option<&str>) -> &'static str {
  match reason {
    Some("STOCK_INSUFICIENTE") => {
      "Compra rechazada por falta de stock. El importe fue reintegrado a tu billetera."
    }
    _ => "La compra fue rechazada. Revisá el detalle para más información.",
  }
}

/// Message key for a classified error. Domain codes win over status buckets.
pub fn error_message_key(error: &ClassifiedError) -> &'static str {
  let code = error.code.to_string().to_ascii_uppercase();
  match code.as_str() {
    c if c.starts_with("HTTP_5") => "common.error.server",
    "HTTP_401" | "AUTH_TOKEN_MISSING" => "common.error.unauthorized",
    "HTTP_403" => "common.error.forbidden",
    "NETWORK_ERROR" => "common.error.network",
    "CARRITO_VACIO" => "sales.error.CARRITO_VACIO",
    "DESCUENTO_INVALIDO" => "sales.error.DESCUENTO_INVALIDO",
    "COMPRA_NO_ENCONTRADA" => "sales.error.COMPRA_NO_ENCONTRADA",
    "CLIENTE_NO_AUTENTICADO" => "sales.error.CLIENTE_NO_AUTENTICADO",
    "STOCK_INSUFICIENTE" => "sales.error.STOCK_INSUFICIENTE",
    c if c.starts_with("VALIDATION_") => "common.error.validation",
    _ => match error.http_status {
      Some(status) if status >= 500 => "common.error.server",
      Some(401) => "common.error.unauthorized",
      Some(403) => "common.error.forbidden",
      _ => "common.error.generic",
    },
  }
}

pub fn error_message(error: &ClassifiedError) -> &'static str {
  match error_message_key(error) {
    "common.error.server" => "El servicio está temporalmente no disponible.",
    "common.error.unauthorized" => "Tu sesión no es válida. Iniciá sesión nuevamente.",
    "common.error.forbidden" => "No tenés permisos para realizar esta acción.",
    "common.error.network" => "No se pudo conectar con el servicio.",
    "common.error.validation" => "Hay datos inválidos en la solicitud.",
    "sales.error.CARRITO_VACIO" => "Tu carrito está vacío.",
    "sales.error.DESCUENTO_INVALIDO" => "El descuento es inválido.",
    "sales.error.COMPRA_NO_ENCONTRADA" => "No se encontró la compra.",
    "sales.error.CLIENTE_NO_AUTENTICADO" => "Debés iniciar sesión para continuar.",
    "sales.error.STOCK_INSUFICIENTE" => "No hay stock suficiente para completar la compra.",
    _ => "Ocurrió un error inesperado.",
  }
}

/// `$ 1.234,56`
pub fn format_money(amount: Money) -> String {
  let cents = amount.cents();
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  let units = (abs / 100).to_string();
  let mut grouped = String::with_capacity(units.len() + units.len() / 3);
  for (i, digit) in units.chars().enumerate() {
    if i > 0 && (units.len() - i) % 3 == 0 {
      grouped.push('.');
    }
    grouped.push(digit);
  }
  format!("{}$ {},{:02}", sign, grouped, abs % 100)
}

pub fn format_date(at: Option<NaiveDateTime>) -> String {
  at.map(|at| at.format("%d/%m/%Y %H:%M").to_string())
    .unwrap_or_else(|| "-".to_string())
}

pub fn render_detail(detail: &PurchaseDetail) -> String {
  let mut out = Vec::new();
  out.push(format!("Compra #{}", detail.id));
  out.push(format!("  Estado: {}", status_label(&detail.state)));
  out.push(format!("  Fecha: {}", format_date(detail.created_at)));
  out.push(format!("  Subtotal: {}", format_money(detail.subtotal)));
  if detail.discount_applied != Money::ZERO {
    out.push(format!("  Descuento: {}", format_money(detail.discount_applied)));
  }
  out.push(format!("  Total: {}", format_money(detail.total)));
  if detail.items.is_empty() {
    out.push("  No se encontraron ítems.".to_string());
  } else {
    out.push("  Ítems:".to_string());
    for item in &detail.items {
      let title = if item.title.is_empty() {
        format!("Película #{}", item.product_id)
      } else {
        item.title.clone()
      };
      out.push(format!(
        "    - {} | Cantidad: {} | Precio unitario: {} | {}",
        title,
        item.quantity,
        format_money(item.unit_price_at_purchase),
        format_money(item.line_subtotal)
      ));
    }
  }
  if detail.state.is_rejected() {
    out.push(format!("  {}", rejection_message(detail.rejection_reason.as_deref())));
    if let Some(details) = &detail.rejection_details {
      out.push(format!("  {}", details));
    }
  }
  out.join("\n")
}

/// One-line progress update for the current view.
pub fn render_progress(view: &PurchaseViewState) -> Option<String> {
  match view.phase {
    ResolutionPhase::Idle => None,
    ResolutionPhase::Fetching => Some("Cargando detalle de compra...".to_string()),
    ResolutionPhase::Polling => Some(format!("Validando stock... (intento {})", view.poll_attempts)),
    ResolutionPhase::Settled => view
      .detail
      .as_ref()
      .map(|d| format!("Estado: {}", status_label(&d.state))),
    ResolutionPhase::Errored => view.error.as_ref().map(render_error),
  }
}

pub fn render_error(error: &ClassifiedError) -> String {
  format!("Error: {} ({})", error_message(error), error.code)
}

pub fn render_summary(row: &PurchaseSummary) -> String {
  format!(
    "Compra #{} | {} | {} | {}",
    row.id,
    format_date(row.created_at),
    format_money(row.total),
    status_label(&row.state)
  )
}
