//! Curated regional items: NGO adoption campaigns and local pet news

use async_trait::async_trait;
use chrono::Utc;

use super::NewsSource;
use crate::article::NewsArticle;
use crate::category::Category;
use crate::error::NewsResult;

struct CuratedItem {
    title: &'static str,
    description: &'static str,
    url: &'static str,
    image_url: &'static str,
    outlet: &'static str,
    category: Category,
}

const ITEMS: &[CuratedItem] = &[
    CuratedItem {
        title: "Campanha de Adoção - Cães SRD",
        description: "Centenas de cães aguardam por um lar amoroso. Venha conhecer nossos peludos!",
        url: "https://www.amparanimal.org.br",
        image_url: "https://images.unsplash.com/photo-1552053831-71594a27632d?w=800&h=600&fit=crop",
        outlet: "AMPARA Animal",
        category: Category::Adoption,
    },
    CuratedItem {
        title: "Feira de Adoção Responsável",
        description: "Domingo no Parque Ibirapuera - Venha adotar seu novo melhor amigo!",
        url: "https://www.adoteumfocinho.com.br",
        image_url: "https://images.unsplash.com/photo-1514888286974-6c03e2ca1dba?w=800&h=600&fit=crop",
        outlet: "Adote um Focinho",
        category: Category::Adoption,
    },
    CuratedItem {
        title: "Cuidados com pets no verão brasileiro",
        description: "Veterinários dão dicas essenciais para proteger seu pet no calor intenso",
        url: "https://exemplo.com/noticia1",
        image_url: "https://images.unsplash.com/photo-1509205477838-a534e43b84b9?w=800&h=600&fit=crop",
        outlet: "Pet Brasil",
        category: Category::Health,
    },
    CuratedItem {
        title: "Nova lei de maus-tratos a animais",
        description: "Entenda as mudanças na legislação brasileira sobre proteção animal",
        url: "https://exemplo.com/noticia2",
        image_url: "https://images.unsplash.com/photo-1453227588063-bb302b62f50b?w=800&h=600&fit=crop",
        outlet: "Jornal Animal",
        category: Category::Behavior,
    },
];

/// Static list standing in for local and regional outlets
///
/// Items are stamped with the fetch time, so they float to the top of the feed.
#[derive(Debug, Default, Clone)]
pub struct CuratedSource;

#[async_trait]
impl NewsSource for CuratedSource {
    fn name(&self) -> &'static str {
        "curated"
    }

    async fn fetch(&self) -> NewsResult<Vec<NewsArticle>> {
        let now = Utc::now();

        Ok(ITEMS
            .iter()
            .enumerate()
            .map(|(index, item)| NewsArticle {
                // Stable ids so admins can hide an item across fetches
                id: format!("br-{}", index),
                title: item.title.to_string(),
                description: item.description.to_string(),
                url: item.url.to_string(),
                image_url: item.image_url.to_string(),
                published_at: now,
                source: item.outlet.to_string(),
                category: item.category,
                api_source: "Brasil".to_string(),
                author: "ONG Brasileira".to_string(),
            })
            .collect())
    }
}
