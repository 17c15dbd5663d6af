/// REST collections managed from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Pedidos,
    Reservas,
    Inventario,
    Menu,
    Mesas,
    Usuarios,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Pedidos,
        Resource::Reservas,
        Resource::Inventario,
        Resource::Menu,
        Resource::Mesas,
        Resource::Usuarios,
    ];

    pub fn collection_path(&self) -> &'static str {
        match self {
            Resource::Pedidos => "/api/pedidos",
            Resource::Reservas => "/api/reservas",
            Resource::Inventario => "/api/inventario",
            Resource::Menu => "/api/menu",
            Resource::Mesas => "/api/mesas",
            Resource::Usuarios => "/api/usuarios",
        }
    }

    /// Listing endpoint; inventario and usuarios list under `/lista`.
    pub fn list_path(&self) -> &'static str {
        match self {
            Resource::Inventario => "/api/inventario/lista",
            Resource::Usuarios => "/api/usuarios/lista",
            other => other.collection_path(),
        }
    }

    pub fn item_path(&self, id: u64) -> String {
        format!("{}/{}", self.collection_path(), id)
    }

    /// View that renders this collection.
    pub fn view(&self) -> &'static str {
        match self {
            Resource::Pedidos => "pedidos",
            Resource::Reservas => "reservas",
            Resource::Inventario => "inventario",
            Resource::Menu => "menu",
            Resource::Mesas => "mesas",
            Resource::Usuarios => "usuarios",
        }
    }

    pub fn from_view(view: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.view() == view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(Resource::Pedidos.list_path(), "/api/pedidos");
        assert_eq!(Resource::Usuarios.list_path(), "/api/usuarios/lista");
        assert_eq!(Resource::Mesas.item_path(4), "/api/mesas/4");
        assert_eq!(Resource::from_view("menu"), Some(Resource::Menu));
        assert_eq!(Resource::from_view("dashboard"), None);
    }
}
