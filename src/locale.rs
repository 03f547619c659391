//! Display languages and the static UI string tables
//!
//! Recipe content arrives in English; every other locale goes through the
//! translation chain. UI labels are served from the tables below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// UI display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Pt,
    En,
    Es,
}

impl Locale {
    /// ISO 639-1 code, as sent to translation providers
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Pt => "pt",
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Language name used in LLM prompts
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::Pt => "Portuguese (Brazil)",
            Locale::En => "English",
            Locale::Es => "Spanish",
        }
    }

    /// Regional code expected by MyMemory's `langpair`
    pub fn mymemory_code(&self) -> &'static str {
        match self {
            Locale::Pt => "pt-BR",
            Locale::En => "en-US",
            Locale::Es => "es-ES",
        }
    }

    pub fn is_english(&self) -> bool {
        matches!(self, Locale::En)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocale(pub String);

impl fmt::Display for UnknownLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown locale: {}", self.0)
    }
}

impl std::error::Error for UnknownLocale {}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        // Regional variants (pt-BR, es-ES, en-US) collapse to the base language
        let base = normalized.split(['-', '_']).next().unwrap_or_default();
        match base {
            "pt" => Ok(Locale::Pt),
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("login", "Login"),
    ("enter", "Enter"),
    ("searchPlaceholder", "Search recipes..."),
    ("featured", "Featured recipes"),
    ("back", "Back"),
    ("servings", "Servings"),
    ("readyIn", "Ready in"),
    ("minutes", "min"),
    ("ingredients", "Ingredients"),
    ("instructions", "Instructions"),
    ("invalidId", "Invalid ID."),
    ("loadError", "Error loading recipe"),
    ("searchError", "Error searching recipes"),
    ("invalidQuery", "Invalid query."),
    ("noRecipesFound", "No recipes found."),
    ("results", "Results for"),
    ("details", "View details"),
    ("about", "About: Papo de Panela is a recipe repository."),
    ("contact", "Contact: contato@papodepanela.local"),
    ("language", "Language"),
    ("portuguese", "Português"),
    ("english", "English"),
    ("spanish", "Español"),
    ("randomRecipes", "Featured recipes"),
    ("randomRecipesDesc", "Randomly selected recipes from our repository."),
    ("searching", "Searching..."),
    ("searchingFor", "Searching for"),
    (
        "translationFailed",
        "Could not translate the term; searching with the original term.",
    ),
    ("recipes", "Recipes"),
    ("favorites", "Favorites"),
    ("categories", "Categories"),
    ("aboutMenu", "About"),
];

const PT: &[(&str, &str)] = &[
    ("login", "Entrar"),
    ("enter", "Entrar"),
    ("searchPlaceholder", "Pesquisar receitas..."),
    ("featured", "Receitas em destaque"),
    ("back", "Voltar"),
    ("servings", "Porções"),
    ("readyIn", "Pronto em"),
    ("minutes", "min"),
    ("ingredients", "Ingredientes"),
    ("instructions", "Modo de preparo"),
    ("invalidId", "ID inválido."),
    ("loadError", "Erro ao carregar receita"),
    ("searchError", "Erro ao buscar receitas"),
    ("invalidQuery", "Query inválida."),
    ("noRecipesFound", "Nenhuma receita encontrada."),
    ("results", "Resultados para"),
    ("details", "Ver detalhes"),
    ("about", "Sobre: Papo de Panela é um repositório de receitas."),
    ("contact", "Contato: contato@papodepanela.local"),
    ("language", "Idioma"),
    ("portuguese", "Português"),
    ("english", "English"),
    ("spanish", "Español"),
    ("randomRecipes", "Receitas em destaque"),
    (
        "randomRecipesDesc",
        "Receitas selecionadas aleatoriamente do nosso repositório.",
    ),
    ("searching", "Buscando..."),
    ("searchingFor", "Buscando por"),
    (
        "translationFailed",
        "Não foi possível traduzir o termo; buscando com o termo original.",
    ),
    ("recipes", "Receitas"),
    ("favorites", "Favoritos"),
    ("categories", "Categorias"),
    ("aboutMenu", "Sobre"),
];

const ES: &[(&str, &str)] = &[
    ("login", "Iniciar sesión"),
    ("enter", "Entrar"),
    ("searchPlaceholder", "Buscar recetas..."),
    ("featured", "Recetas destacadas"),
    ("back", "Volver"),
    ("servings", "Porciones"),
    ("readyIn", "Listo en"),
    ("minutes", "min"),
    ("ingredients", "Ingredientes"),
    ("instructions", "Instrucciones"),
    ("invalidId", "ID inválido."),
    ("loadError", "Error al cargar la receta"),
    ("searchError", "Error al buscar recetas"),
    ("invalidQuery", "Consulta inválida."),
    ("noRecipesFound", "No se encontraron recetas."),
    ("results", "Resultados para"),
    ("details", "Ver detalles"),
    (
        "about",
        "Acerca de: Papo de Panela es un repositorio de recetas.",
    ),
    ("contact", "Contacto: contato@papodepanela.local"),
    ("language", "Idioma"),
    ("portuguese", "Português"),
    ("english", "English"),
    ("spanish", "Español"),
    ("randomRecipes", "Recetas destacadas"),
    (
        "randomRecipesDesc",
        "Recetas seleccionadas al azar de nuestro repositorio.",
    ),
    ("searching", "Buscando..."),
    ("searchingFor", "Buscando por"),
    (
        "translationFailed",
        "No se pudo traducir el término; buscando con el término original.",
    ),
    ("recipes", "Recetas"),
    ("favorites", "Favoritos"),
    ("categories", "Categorías"),
    ("aboutMenu", "Acerca de"),
];

fn table(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::Pt => PT,
        Locale::En => EN,
        Locale::Es => ES,
    }
}

/// Full UI string table for a locale
pub fn ui_strings(locale: Locale) -> BTreeMap<&'static str, &'static str> {
    table(locale).iter().copied().collect()
}

/// Look up a UI string; unknown keys come back unchanged
pub fn t<'a>(locale: Locale, key: &'a str) -> &'a str {
    table(locale)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

/// Cuisines shown as category sections on the home feed
pub const HOME_CUISINES: [&str; 4] = ["italian", "mexican", "vegetarian", "asian"];

/// Localized section label for a cuisine key
pub fn cuisine_label(cuisine: &str, locale: Locale) -> String {
    let (pt, en, es) = match cuisine {
        "italian" => ("Italiano", "Italian", "Italiano"),
        "mexican" => ("Mexicano", "Mexican", "Mexicano"),
        "vegetarian" => ("Vegetariano", "Vegetarian", "Vegetariano"),
        "asian" => ("Asiático", "Asian", "Asiático"),
        other => return other.to_string(),
    };

    match locale {
        Locale::Pt => pt,
        Locale::En => en,
        Locale::Es => es,
    }
    .to_string()
}
