//! 产品编辑表单抽象 - 业务能力层
//!
//! `ProductForm` 把发布状态机需要的页面操作收拢为一个可注入的接口：
//! 流程层只面向该接口，测试可以用脚本化的假实现覆盖所有状态转移

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::DomDriver;
use crate::services::field_setter::{FieldSetter, FieldTarget, SetOutcome};
use crate::services::navigator::{NavOutcome, Navigator, PageTarget};
use crate::services::taxonomy::{ResolveOutcome, TaxonomyResolver, TaxonomyTarget};

/// 发布按钮选择器
const PUBLISH_BUTTON: &str = "#publish";
/// 发布按钮的兜底选择器（多种可能的按钮形态）
const PUBLISH_BUTTON_BROAD: &str =
    "input#publish, input[name='publish'], input[value='发布'], input[value='Publish']";

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 某一种点击方式成功执行（1=直接点击 2=脚本点击 3=模拟指针 4=兜底选择器）
    Clicked { method: u8 },
    /// 所有点击方式都失败
    Failed,
}

/// 发布后的观测信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishSignal {
    /// 出现成功提示横幅
    Banner,
    /// 编辑页标记重新出现（已重定向到编辑视图）
    EditorMarker,
    /// 地址变为发布后的编辑页形态
    EditUrl,
    /// 三种信号均未观测到；不算失败，远端状态才是事实来源
    Unconfirmed,
}

/// 发布状态机对页面的全部依赖
#[async_trait]
pub trait ProductForm: Send + Sync {
    /// 打开添加新产品页面
    async fn open_entry_page(&self) -> Result<NavOutcome>;
    /// 填写标题
    async fn set_title(&self, text: &str) -> Result<SetOutcome>;
    /// 填写价格
    async fn set_price(&self, text: &str) -> Result<SetOutcome>;
    /// 查找或新建产品分类并选中
    async fn resolve_category(&self, label: &str) -> Result<ResolveOutcome>;
    /// 查找或新建品牌并选中
    async fn resolve_brand(&self, label: &str) -> Result<ResolveOutcome>;
    /// 读回标题当前值
    async fn read_title(&self) -> Result<Option<String>>;
    /// 读回价格当前值
    async fn read_price(&self) -> Result<Option<String>>;
    /// 是否至少有一个产品分类被勾选
    async fn category_selected(&self) -> Result<bool>;
    /// 等待发布按钮可点击；超出上限返回 false（调用方仍会继续提交）
    async fn await_publishable(&self) -> Result<bool>;
    /// 逐级升级的方式点击发布按钮
    async fn submit(&self) -> Result<SubmitOutcome>;
    /// 观测发布结果
    async fn verify_published(&self) -> Result<PublishSignal>;
}

/// 面向 WordPress 产品编辑页的实现
pub struct WpProductForm<'a> {
    dom: &'a DomDriver,
    navigator: Navigator,
    fields: FieldSetter,
    taxonomy: TaxonomyResolver,
    new_product: PageTarget,
    title: FieldTarget,
    price: FieldTarget,
    category: TaxonomyTarget,
    brand: TaxonomyTarget,
    publish_wait_secs: u64,
}

impl<'a> WpProductForm<'a> {
    pub fn new(dom: &'a DomDriver, config: &Config) -> Self {
        Self {
            dom,
            navigator: Navigator::new(config.page_wait_secs, config.settle_ms),
            fields: FieldSetter::new(config.element_wait_secs),
            taxonomy: TaxonomyResolver::new(config.element_wait_secs, config.settle_ms),
            new_product: PageTarget::new_product(&config.site_url),
            title: FieldTarget::title(),
            price: FieldTarget::regular_price(),
            category: TaxonomyTarget::category(),
            brand: TaxonomyTarget::brand(),
            publish_wait_secs: config.publish_wait_secs,
        }
    }

    /// 发布按钮当前是否不可点击
    async fn publish_disabled(&self) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const b = document.querySelector('{sel}');
                if (!b) return true;
                return b.disabled === true
                    || b.classList.contains('disabled')
                    || b.getAttribute('aria-disabled') === 'true';
            }})()"#,
            sel = PUBLISH_BUTTON
        );
        self.dom.eval_as(js).await
    }
}

#[async_trait]
impl ProductForm for WpProductForm<'_> {
    async fn open_entry_page(&self) -> Result<NavOutcome> {
        Ok(self.navigator.goto(&self.new_product, self.dom).await)
    }

    async fn set_title(&self, text: &str) -> Result<SetOutcome> {
        Ok(self.fields.set(&self.title, text, self.dom).await)
    }

    async fn set_price(&self, text: &str) -> Result<SetOutcome> {
        Ok(self.fields.set(&self.price, text, self.dom).await)
    }

    async fn resolve_category(&self, label: &str) -> Result<ResolveOutcome> {
        Ok(self.taxonomy.resolve(&self.category, label, self.dom).await)
    }

    async fn resolve_brand(&self, label: &str) -> Result<ResolveOutcome> {
        Ok(self.taxonomy.resolve(&self.brand, label, self.dom).await)
    }

    async fn read_title(&self) -> Result<Option<String>> {
        Ok(self.fields.read(&self.title, self.dom).await)
    }

    async fn read_price(&self) -> Result<Option<String>> {
        Ok(self.fields.read(&self.price, self.dom).await)
    }

    async fn category_selected(&self) -> Result<bool> {
        let checked = self
            .dom
            .count(&format!("{} li input:checked", self.category.checklist))
            .await?;
        Ok(checked > 0)
    }

    async fn await_publishable(&self) -> Result<bool> {
        if !self.dom.wait_for(PUBLISH_BUTTON, 5).await? {
            warn!("⚠️ 发布按钮未出现");
            return Ok(false);
        }

        self.dom.scroll_to_center(PUBLISH_BUTTON).await?;
        sleep(Duration::from_secs(1)).await;

        // 远端校验可能异步改变按钮状态，按秒轮询直至上限
        for waited in 0..self.publish_wait_secs {
            if !self.publish_disabled().await? {
                info!("发布按钮已变为可点击状态，等待了{}秒", waited);
                // 再等一小段，确保按钮完全可用
                sleep(Duration::from_secs(2)).await;
                return Ok(true);
            }
            debug!("发布按钮仍处于不可点击状态，已等待{}秒...", waited);
            sleep(Duration::from_secs(1)).await;
        }

        warn!("⚠️ 发布按钮在最大等待时间内未变为可点击状态，将尝试点击");
        Ok(false)
    }

    async fn submit(&self) -> Result<SubmitOutcome> {
        // 方法1：直接交互点击
        match self.dom.mouse_click(PUBLISH_BUTTON).await {
            Ok(()) => {
                info!("方法1：直接点击发布按钮");
                return Ok(SubmitOutcome::Clicked { method: 1 });
            }
            Err(e) => debug!("直接点击发布按钮失败: {}", e),
        }

        // 方法2：脚本点击
        match self.dom.js_click(PUBLISH_BUTTON).await {
            Ok(()) => {
                info!("方法2：使用脚本点击发布按钮");
                return Ok(SubmitOutcome::Clicked { method: 2 });
            }
            Err(e) => debug!("脚本点击发布按钮失败: {}", e),
        }

        // 方法3：模拟指针移动加点击
        match self.dom.pointer_click(PUBLISH_BUTTON).await {
            Ok(()) => {
                info!("方法3：模拟指针点击发布按钮");
                return Ok(SubmitOutcome::Clicked { method: 3 });
            }
            Err(e) => debug!("模拟指针点击发布按钮失败: {}", e),
        }

        // 方法4：兜底选择器重新查找并脚本点击
        match self.dom.js_click(PUBLISH_BUTTON_BROAD).await {
            Ok(()) => {
                info!("方法4：找到并点击备选发布按钮");
                Ok(SubmitOutcome::Clicked { method: 4 })
            }
            Err(e) => {
                warn!("⚠️ 无法找到任何可用的发布按钮: {}", e);
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    async fn verify_published(&self) -> Result<PublishSignal> {
        if self.dom.wait_for(".updated", 15).await? {
            info!("检测到发布成功消息");
            return Ok(PublishSignal::Banner);
        }

        if self.dom.wait_for("#title", 15).await? {
            info!("已重定向到新页面，发布可能成功");
            return Ok(PublishSignal::EditorMarker);
        }

        let url = self.dom.current_url().await?;
        if url.contains("post.php") && url.contains("post_type=product") {
            info!("URL已更改为编辑页面，发布可能成功");
            return Ok(PublishSignal::EditUrl);
        }

        Ok(PublishSignal::Unconfirmed)
    }
}
