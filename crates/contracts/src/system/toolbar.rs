//! Состояние нижней панели инструментов дизайнера.
//!
//! Первые две вкладки фиксированы (инструменты и виджеты), за ними идут вкладки
//! поиска по медиатеке. Состояние сохраняется как непрозрачная пользовательская
//! настройка `toolbar`.

use serde::{Deserialize, Serialize};

/// Количество фиксированных (неудаляемых) вкладок
pub const FIXED_TABS: usize = 2;

/// Ключ пользовательской настройки, под которым хранится состояние
pub const TOOLBAR_PREFERENCE: &str = "toolbar";

/// Ширина области контента в процентах от ширины панели
pub const CONTENT_WIDTH_PCT: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDimensions {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl Default for CardDimensions {
    fn default() -> Self {
        Self {
            width: 100,
            height: 80,
            margin: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub start: u32,
    pub length: u32,
}

/// Сколько карточек помещается в видимую область и с какой начинать.
pub fn calculate_pagination(
    page: u32,
    container_width_px: f64,
    content_width_pct: u32,
    card: CardDimensions,
) -> Pagination {
    let width = container_width_px * f64::from(content_width_pct) / 100.0;
    let footprint = f64::from(card.width + card.margin * 2);

    let length = if width > 0.0 && footprint > 0.0 {
        (width / footprint).floor() as u32
    } else {
        0
    };

    Pagination {
        start: page * length,
        length,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Tools,
    Widgets,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchFilters {
    pub name: String,
    pub tag: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    #[serde(rename = "name")]
    pub kind: PanelKind,
    pub title: String,
    pub page: u32,
    #[serde(default)]
    pub filters: SearchFilters,
    /// `None`: поиск ничего не нашёл
    #[serde(default)]
    pub content: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub prev_page_disabled: bool,
    #[serde(default)]
    pub next_page_disabled: bool,
}

impl Panel {
    fn fixed(kind: PanelKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            page: 0,
            filters: SearchFilters::default(),
            content: Some(Vec::new()),
            active: false,
            prev_page_disabled: true,
            next_page_disabled: true,
        }
    }

    fn search(title: String) -> Self {
        Self::fixed(PanelKind::Search, &title)
    }
}

/// Запрос к API поиска по медиатеке
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSearchRequest {
    pub retired: u8,
    pub assignable: u8,
    pub start: u32,
    pub length: u32,
    pub media: String,
    pub tags: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSearchResponse {
    pub data: Vec<serde_json::Value>,
    pub records_total: u64,
}

/// Сохраняемая часть состояния
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarPrefs {
    #[serde(default)]
    pub menu_items: Vec<Panel>,
    pub opened_menu: i64,
    pub previous_opened_menu: i64,
}

impl ToolbarPrefs {
    /// Сброшенные настройки
    pub fn cleared() -> Self {
        Self {
            menu_items: Vec::new(),
            opened_menu: -1,
            previous_opened_menu: -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarState {
    pub menu_items: Vec<Panel>,
    pub opened_menu: Option<usize>,
    pub previous_opened_menu: Option<usize>,
    menu_index: u32,
}

impl Default for ToolbarState {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolbarState {
    pub fn new() -> Self {
        Self {
            menu_items: vec![
                Panel::fixed(PanelKind::Tools, "Tools"),
                Panel::fixed(PanelKind::Widgets, "Widgets"),
            ],
            opened_menu: None,
            previous_opened_menu: None,
            menu_index: 0,
        }
    }

    /// Восстановление из сохранённых настроек. Фиксированные вкладки всегда свои.
    pub fn from_prefs(prefs: ToolbarPrefs) -> Self {
        let mut state = Self::new();
        state.menu_items.extend(
            prefs
                .menu_items
                .into_iter()
                .filter(|p| p.kind == PanelKind::Search),
        );

        let len = state.menu_items.len();
        let to_index = |raw: i64| usize::try_from(raw).ok().filter(|i| *i < len);
        state.opened_menu = to_index(prefs.opened_menu);
        state.previous_opened_menu = to_index(prefs.previous_opened_menu);
        state.menu_index = len as u32;

        for (index, panel) in state.menu_items.iter_mut().enumerate() {
            panel.active = Some(index) == state.opened_menu;
        }
        state
    }

    /// Только вкладки поиска, без содержимого и с первой страницей.
    pub fn to_prefs(&self) -> ToolbarPrefs {
        let menu_items = self.menu_items[FIXED_TABS.min(self.menu_items.len())..]
            .iter()
            .map(|panel| Panel {
                content: Some(Vec::new()),
                page: 0,
                ..panel.clone()
            })
            .collect();

        ToolbarPrefs {
            menu_items,
            opened_menu: self.opened_menu.map_or(-1, |i| i as i64),
            previous_opened_menu: self.previous_opened_menu.map_or(-1, |i| i as i64),
        }
    }

    /// Открывает вкладку `menu`; `None` переключает между открытой и предыдущей.
    ///
    /// Возвращает индекс фиксированной вкладки, содержимое которой надо загрузить.
    pub fn open_tab(&mut self, menu: Option<usize>) -> Option<usize> {
        match menu {
            None => {
                if let Some(opened) = self.opened_menu.take() {
                    self.previous_opened_menu = Some(opened);
                    self.menu_items[opened].active = false;
                    None
                } else if let Some(previous) = self.previous_opened_menu.take() {
                    self.menu_items[previous].active = true;
                    self.opened_menu = Some(previous);
                    (previous < FIXED_TABS).then_some(previous)
                } else {
                    None
                }
            }
            Some(menu) if menu < self.menu_items.len() => {
                for panel in self.menu_items.iter_mut() {
                    panel.active = false;
                }
                self.menu_items[menu].active = true;
                self.opened_menu = Some(menu);
                self.previous_opened_menu = None;
                (menu < FIXED_TABS).then_some(menu)
            }
            Some(_) => None,
        }
    }

    /// Добавляет пустую вкладку поиска и открывает её.
    pub fn create_new_tab(&mut self) -> usize {
        self.menu_index += 1;
        self.menu_items
            .push(Panel::search(format!("Tab {}", self.menu_index)));
        let index = self.menu_items.len() - 1;
        self.open_tab(Some(index));
        index
    }

    /// Удаляет вкладку поиска. Фиксированные вкладки не удаляются.
    pub fn delete_tab(&mut self, menu: usize) -> bool {
        if menu < FIXED_TABS || menu >= self.menu_items.len() {
            return false;
        }
        self.menu_items.remove(menu);
        self.reset_if_search_opened();
        true
    }

    pub fn delete_all_tabs(&mut self) {
        self.menu_items.truncate(FIXED_TABS);
        self.reset_if_search_opened();
    }

    fn reset_if_search_opened(&mut self) {
        if self.opened_menu.is_some_and(|i| i >= FIXED_TABS) {
            self.opened_menu = None;
            self.previous_opened_menu = None;
        }
        // индексы могли сдвинуться
        let len = self.menu_items.len();
        if self.previous_opened_menu.is_some_and(|i| i >= len) {
            self.previous_opened_menu = None;
        }
    }

    pub fn next_page(&mut self, menu: usize) {
        if let Some(panel) = self.menu_items.get_mut(menu) {
            panel.page += 1;
        }
    }

    pub fn previous_page(&mut self, menu: usize) {
        if let Some(panel) = self.menu_items.get_mut(menu) {
            panel.page = panel.page.saturating_sub(1);
        }
    }

    /// Запоминает фильтры вкладки, переименовывает её и строит запрос поиска.
    pub fn search_request(
        &mut self,
        menu: usize,
        filters: SearchFilters,
        pagination: Pagination,
    ) -> Option<MediaSearchRequest> {
        if menu < FIXED_TABS || menu >= self.menu_items.len() {
            return None;
        }

        let mut title = if filters.name.is_empty() {
            self.menu_index += 1;
            format!("Tab {}", self.menu_index)
        } else {
            format!("\"{}\"", filters.name)
        };
        if !filters.tag.is_empty() {
            title.push_str(&format!(" {{{}}} ", filters.tag));
        }
        if !filters.media_type.is_empty() {
            title.push_str(&format!(" [{}] ", filters.media_type));
        }

        let panel = &mut self.menu_items[menu];
        panel.title = title;
        panel.prev_page_disabled = pagination.start == 0;
        panel.filters = filters.clone();

        Some(MediaSearchRequest {
            retired: 0,
            assignable: 1,
            start: pagination.start,
            length: pagination.length,
            media: filters.name,
            tags: filters.tag,
            media_type: filters.media_type,
        })
    }

    pub fn apply_search_results(
        &mut self,
        menu: usize,
        response: MediaSearchResponse,
        pagination: Pagination,
    ) {
        if let Some(panel) = self.menu_items.get_mut(menu) {
            let end = u64::from(pagination.start) + u64::from(pagination.length);
            panel.next_page_disabled = end >= response.records_total;
            panel.content = if response.data.is_empty() {
                None
            } else {
                Some(response.data)
            };
        }
    }

    /// Статическое содержимое фиксированной вкладки; видна только текущая страница.
    pub fn apply_fixed_content(
        &mut self,
        menu: usize,
        items: Vec<serde_json::Value>,
        pagination: Pagination,
    ) {
        if menu >= FIXED_TABS || menu >= self.menu_items.len() {
            return;
        }
        let start = pagination.start as usize;
        let end = start + pagination.length as usize;
        let panel = &mut self.menu_items[menu];
        panel.prev_page_disabled = pagination.start == 0;
        panel.next_page_disabled = end >= items.len();
        panel.content = Some(
            items
                .into_iter()
                .skip(start)
                .take(pagination.length as usize)
                .collect(),
        );
        panel.active = true;
    }
}
