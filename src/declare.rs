use serde::{Deserialize, Serialize};

/// 商店庫存分類
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockCategory {
    /// 裝備 gear_stock
    Gear,
    /// 蛋 egg_stock
    Egg,
    /// 種子 seeds_stock
    Seeds,
}

impl StockCategory {
    /// 頁面上倒數計時元素 id 的片段（countdown-gear 等）
    pub fn countdown_fragment(&self) -> &'static str {
        match self {
            StockCategory::Gear => "gear",
            StockCategory::Egg => "egg",
            StockCategory::Seeds => "seeds",
        }
    }

    /// 依區塊標題分類，標題需先轉為大寫
    pub fn from_title(title: &str) -> Option<StockCategory> {
        if title.contains("GEAR") {
            Some(StockCategory::Gear)
        } else if title.contains("EGG") {
            Some(StockCategory::Egg)
        } else if title.contains("SEEDS") {
            Some(StockCategory::Seeds)
        } else {
            None
        }
    }

    pub fn iterator() -> impl Iterator<Item = Self> {
        [Self::Gear, Self::Egg, Self::Seeds].iter().copied()
    }
}

/// 單一品項與其數量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
}

/// 一個分類的庫存清單與補貨倒數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSection {
    pub items: Vec<LineItem>,
    pub updates_in: String,
}

impl Default for StockSection {
    fn default() -> Self {
        StockSection {
            items: Vec::new(),
            updates_in: "Unknown".to_string(),
        }
    }
}

impl StockSection {
    /// 加入一個品項；同名品項不重複出現，數量累加
    pub fn push_item(&mut self, name: &str, quantity: u32) {
        if let Some(existing) = self.items.iter_mut().find(|item| item.name == name) {
            existing.quantity += quantity;
        } else {
            self.items.push(LineItem {
                name: name.to_string(),
                quantity,
            });
        }
    }
}

/// 三個分類的完整庫存快照，缺少的分類以空清單與 "Unknown" 填補
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub gear_stock: StockSection,
    pub egg_stock: StockSection,
    pub seeds_stock: StockSection,
}

impl StockSnapshot {
    pub fn section(&self, category: StockCategory) -> &StockSection {
        match category {
            StockCategory::Gear => &self.gear_stock,
            StockCategory::Egg => &self.egg_stock,
            StockCategory::Seeds => &self.seeds_stock,
        }
    }

    pub fn section_mut(&mut self, category: StockCategory) -> &mut StockSection {
        match category {
            StockCategory::Gear => &mut self.gear_stock,
            StockCategory::Egg => &mut self.egg_stock,
            StockCategory::Seeds => &mut self.seeds_stock,
        }
    }

    /// 三個分類的品項是否全為空
    pub fn is_empty(&self) -> bool {
        StockCategory::iterator().all(|category| self.section(category).items.is_empty())
    }
}
