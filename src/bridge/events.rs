//! Typed push events and their built-in reactions.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::feed::{ActivityCategory, FeedItem, FeedKind};

pub const PEDIDO_RECIBIDO: &str = "pedido_recibido";
pub const ESTADO_PEDIDO_ACTUALIZADO: &str = "estado_pedido_actualizado";
pub const ESTADO_MESA_ACTUALIZADO: &str = "estado_mesa_actualizado";
pub const NUEVA_NOTIFICACION: &str = "nueva_notificacion";
pub const NUEVA_RESERVA: &str = "nueva_reserva";
pub const STOCK_BAJO: &str = "stock_bajo";
pub const CONNECT: &str = "connect";
pub const DISCONNECT: &str = "disconnect";
pub const CONNECTION_RESPONSE: &str = "connection_response";

/// Events that carry domain data and refresh the header counters.
pub const DOMAIN_EVENTS: [&str; 6] = [
    PEDIDO_RECIBIDO,
    ESTADO_PEDIDO_ACTUALIZADO,
    ESTADO_MESA_ACTUALIZADO,
    NUEVA_NOTIFICACION,
    NUEVA_RESERVA,
    STOCK_BAJO,
];

/// The fixed set of names consumers may subscribe to.
pub const SUBSCRIBED_EVENTS: [&str; 9] = [
    PEDIDO_RECIBIDO,
    ESTADO_PEDIDO_ACTUALIZADO,
    ESTADO_MESA_ACTUALIZADO,
    NUEVA_NOTIFICACION,
    NUEVA_RESERVA,
    STOCK_BAJO,
    CONNECT,
    DISCONNECT,
    CONNECTION_RESPONSE,
];

pub fn is_domain_event(name: &str) -> bool {
    DOMAIN_EVENTS.contains(&name)
}

/// Entity id as the server sends it, number or string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

/// Which feed a reaction writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTarget {
    Activity,
    PanelAlerts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    PedidoRecibido {
        pedido_id: EntityId,
    },
    EstadoPedidoActualizado {
        pedido_id: EntityId,
        estado: String,
    },
    EstadoMesaActualizado {
        mesa_id: Option<EntityId>,
        estado: Option<String>,
    },
    NuevaNotificacion {
        mensaje: String,
        tipo: FeedKind,
        sonido: bool,
    },
    NuevaReserva {
        fecha: String,
    },
    StockBajo {
        item: String,
        cantidad: String,
        unidad: String,
    },
    ConnectionResponse {
        status: Option<String>,
    },
}

#[derive(Deserialize)]
struct PedidoRecibidoPayload {
    pedido: PedidoRef,
}

#[derive(Deserialize)]
struct PedidoRef {
    id: EntityId,
}

#[derive(Deserialize)]
struct EstadoPedidoPayload {
    pedido_id: EntityId,
    estado: String,
}

#[derive(Deserialize)]
struct EstadoMesaPayload {
    #[serde(default)]
    mesa_id: Option<EntityId>,
    #[serde(default)]
    estado: Option<String>,
}

#[derive(Deserialize)]
struct NotificacionPayload {
    mensaje: String,
    #[serde(default)]
    tipo: Option<String>,
    #[serde(default)]
    sonido: Option<bool>,
}

#[derive(Deserialize)]
struct ReservaPayload {
    fecha: String,
}

#[derive(Deserialize)]
struct StockBajoPayload {
    item: String,
    cantidad: Value,
    #[serde(default)]
    unidad: String,
}

#[derive(Deserialize)]
struct ConnectionResponsePayload {
    #[serde(default)]
    status: Option<String>,
}

fn payload<T: DeserializeOwned>(data: &Value) -> Result<T, serde_json::Error> {
    T::deserialize(data)
}

fn quantity(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl PushEvent {
    /// Decode a named event. `Ok(None)` for names without a built-in
    /// reaction (`connect`, `disconnect`, unknown names).
    pub fn decode(name: &str, data: &Value) -> Result<Option<Self>, serde_json::Error> {
        let event = match name {
            PEDIDO_RECIBIDO => {
                let p: PedidoRecibidoPayload = payload(data)?;
                PushEvent::PedidoRecibido { pedido_id: p.pedido.id }
            }
            ESTADO_PEDIDO_ACTUALIZADO => {
                let p: EstadoPedidoPayload = payload(data)?;
                PushEvent::EstadoPedidoActualizado {
                    pedido_id: p.pedido_id,
                    estado: p.estado,
                }
            }
            ESTADO_MESA_ACTUALIZADO => {
                let p: EstadoMesaPayload = payload(data)?;
                PushEvent::EstadoMesaActualizado {
                    mesa_id: p.mesa_id,
                    estado: p.estado,
                }
            }
            NUEVA_NOTIFICACION => {
                let p: NotificacionPayload = payload(data)?;
                PushEvent::NuevaNotificacion {
                    mensaje: p.mensaje,
                    tipo: p.tipo.as_deref().map(FeedKind::from_tag).unwrap_or(FeedKind::Info),
                    sonido: p.sonido.unwrap_or(true),
                }
            }
            NUEVA_RESERVA => {
                let p: ReservaPayload = payload(data)?;
                PushEvent::NuevaReserva { fecha: p.fecha }
            }
            STOCK_BAJO => {
                let p: StockBajoPayload = payload(data)?;
                PushEvent::StockBajo {
                    item: p.item,
                    cantidad: quantity(p.cantidad),
                    unidad: p.unidad,
                }
            }
            CONNECTION_RESPONSE => {
                let status = if data.is_null() {
                    None
                } else {
                    payload::<ConnectionResponsePayload>(data)?.status
                };
                PushEvent::ConnectionResponse { status }
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::PedidoRecibido { .. } => PEDIDO_RECIBIDO,
            PushEvent::EstadoPedidoActualizado { .. } => ESTADO_PEDIDO_ACTUALIZADO,
            PushEvent::EstadoMesaActualizado { .. } => ESTADO_MESA_ACTUALIZADO,
            PushEvent::NuevaNotificacion { .. } => NUEVA_NOTIFICACION,
            PushEvent::NuevaReserva { .. } => NUEVA_RESERVA,
            PushEvent::StockBajo { .. } => STOCK_BAJO,
            PushEvent::ConnectionResponse { .. } => CONNECTION_RESPONSE,
        }
    }

    /// Views whose content this event changes; the active one is re-rendered.
    pub fn affected_views(&self) -> &'static [&'static str] {
        match self {
            PushEvent::PedidoRecibido { .. } | PushEvent::EstadoPedidoActualizado { .. } => &["pedidos"],
            PushEvent::EstadoMesaActualizado { .. } => &["mesas"],
            PushEvent::NuevaReserva { .. } => &["reservas"],
            PushEvent::StockBajo { .. } => &["inventario"],
            PushEvent::NuevaNotificacion { .. } => &["notificaciones"],
            PushEvent::ConnectionResponse { .. } => &[],
        }
    }

    pub fn feed_item(&self) -> Option<(FeedTarget, FeedItem)> {
        let entry = match self {
            PushEvent::PedidoRecibido { pedido_id } => (
                FeedTarget::Activity,
                FeedItem::activity(ActivityCategory::Pedido, format!("Nuevo pedido #{pedido_id}")),
            ),
            PushEvent::EstadoPedidoActualizado { pedido_id, estado } => (
                FeedTarget::Activity,
                FeedItem::activity(
                    ActivityCategory::Pedido,
                    format!("Pedido #{pedido_id} actualizado a {estado}"),
                ),
            ),
            PushEvent::NuevaReserva { fecha } => (
                FeedTarget::Activity,
                FeedItem::activity(ActivityCategory::Reserva, format!("Nueva reserva para {fecha}")),
            ),
            PushEvent::StockBajo { item, cantidad, unidad } => {
                let message = format!("Stock bajo de {item}: {cantidad} {unidad}");
                (
                    FeedTarget::PanelAlerts,
                    FeedItem::new(FeedKind::Warning, message.trim_end(), "⚠️"),
                )
            }
            PushEvent::EstadoMesaActualizado { .. }
            | PushEvent::NuevaNotificacion { .. }
            | PushEvent::ConnectionResponse { .. } => return None,
        };
        Some(entry)
    }

    /// Toast shown to the user, if any.
    pub fn notice(&self) -> Option<(String, FeedKind)> {
        match self {
            PushEvent::NuevaNotificacion { mensaje, tipo, .. } => Some((mensaje.clone(), *tipo)),
            _ => None,
        }
    }

    pub fn chimes(&self) -> bool {
        match self {
            PushEvent::PedidoRecibido { .. } => true,
            PushEvent::NuevaNotificacion { sonido, .. } => *sonido,
            _ => false,
        }
    }
}
